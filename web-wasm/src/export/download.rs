//! Browser download of an export artifact.

use gazette_matcher_common::ExportArtifact;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Save the artifact through a temporary object URL.
pub fn download_artifact(artifact: &ExportArtifact) -> Result<(), JsValue> {
    let data = js_sys::Uint8Array::from(artifact.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&data);

    let options = BlobPropertyBag::new();
    options.set_type(artifact.format.mime_type());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}
