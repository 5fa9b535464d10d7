//! The `image` element.
//!
//! Only images embedded in `data:` URLs are drawn.  PNG and JPEG data is handed to the
//! emitter as is; anything else must go through the [`ImageEncoder`] first.

use data_url::DataUrl;

use crate::drawing_ctx::{DrawingCtx, Frame};
use crate::emitter::{ImageEncoder, ImageFormat};
use crate::error::Diagnostic;
use crate::length::*;
use crate::node::{Node, NodeBorrow};
use crate::rect::Rect;
use crate::xml::Attributes;

/// Decoded contents of a `data:` URL.
#[derive(Debug, PartialEq)]
struct BinaryData {
    data: Vec<u8>,
    mime_type: String,
}

fn decode_data_url(url: &str) -> Option<BinaryData> {
    let data_url = DataUrl::process(url).ok()?;

    let mime_type = format!(
        "{}/{}",
        data_url.mime_type().type_,
        data_url.mime_type().subtype
    );

    let (data, fragment_id) = data_url.decode_to_vec().ok()?;

    // data: URLs cannot have fragment identifiers; one probably means that the
    // URL was mis-quoted.
    if fragment_id.is_some() {
        return None;
    }

    Some(BinaryData { data, mime_type })
}

/// Converts image data to something the emitter can embed.
fn encode(
    image: BinaryData,
    encoder: Option<&dyn ImageEncoder>,
) -> Result<(Vec<u8>, ImageFormat), Diagnostic> {
    if let Some(format) = ImageFormat::from_mime_type(&image.mime_type) {
        return Ok((image.data, format));
    }

    encoder
        .and_then(|e| e.encode(&image.data, &image.mime_type))
        .ok_or_else(|| Diagnostic::unsupported(&format!("images of type {}", image.mime_type)))
}

/// The placement rectangle of an image; `width` and `height` are required since the
/// image is never decoded.
pub fn image_rect(attrs: &Attributes, params: &NormalizeParams) -> Result<Rect, Diagnostic> {
    let x = length::<Horizontal>(attrs, "x", params)?.unwrap_or(0.0);
    let y = length::<Vertical>(attrs, "y", params)?.unwrap_or(0.0);
    let w = length::<Horizontal>(attrs, "width", params)?;
    let h = length::<Vertical>(attrs, "height", params)?;

    match (w, h) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(Rect::from_origin_size(x, y, w, h)),
        (Some(w), _) if w > 0.0 => Err(Diagnostic::invalid_attribute("image", "height")),
        _ => Err(Diagnostic::invalid_attribute("image", "width")),
    }
}

fn length<N: Normalize>(
    attrs: &Attributes,
    name: &str,
    params: &NormalizeParams,
) -> Result<Option<f64>, Diagnostic> {
    match attrs.parse::<Length<N>>(name) {
        None => Ok(None),
        Some(Ok(l)) => Ok(Some(l.to_user(params))),
        Some(Err(_)) => Err(Diagnostic::invalid_attribute("image", name)),
    }
}

pub fn draw_image(dc: &mut DrawingCtx<'_>, node: &Node, frame: &Frame) {
    let (href, rect) = {
        let elt = node.borrow_element();
        let attrs = elt.attributes();

        let Some(href) = attrs.get_href().map(String::from) else {
            return;
        };

        (href, image_rect(attrs, &frame.params))
    };

    let rect = match rect {
        Ok(rect) => rect,
        Err(diagnostic) => {
            dc.session().report(diagnostic);
            return;
        }
    };

    if !frame.values.is_visible() {
        return;
    }

    if !href.starts_with("data:") {
        dc.session()
            .report(Diagnostic::unsupported("images that are not in data: URLs"));
        return;
    }

    let Some(image) = decode_data_url(&href) else {
        svgops_log!(dc.session(), "could not decode image data in {}", node);
        dc.session().report(Diagnostic::unresolved(&href));
        return;
    };

    match encode(image, dc.image_encoder()) {
        Ok((data, format)) => {
            dc.set_transform(&frame.transform);
            dc.emitter().draw_image(&data, format, &rect);
        }

        Err(diagnostic) => dc.session().report(diagnostic),
    }
}
