//! Matching service calls from the browser.
//!
//! `POST /match` goes through `XMLHttpRequest` because `fetch` does not
//! report upload progress. The list and clear calls use `fetch`.

use futures::channel::oneshot;
use gazette_matcher_common::{
    Error, MatchResponse, Record, RemoteErrorBody, Result, SubmissionParameters, TransferEvent,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, ProgressEvent, Request, RequestInit, RequestMode, Response, XmlHttpRequest};

const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

/// Upper bound on a whole submission round trip.
pub const SUBMIT_TIMEOUT_MS: u32 = 600_000;

/// API root, fixed at build time through `GAZETTE_MATCHER_API_BASE`.
pub fn api_base() -> &'static str {
    option_env!("GAZETTE_MATCHER_API_BASE")
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
}

/// How an XHR ended.
enum XhrEnd {
    Load,
    Error,
    Timeout,
}

fn js_error(err: JsValue) -> Error {
    Error::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn transfer_event(ev: &ProgressEvent, upload: bool) -> TransferEvent {
    let loaded = ev.loaded().max(0.0) as u64;
    let total = (ev.length_computable() && ev.total() > 0.0).then(|| ev.total() as u64);
    if upload {
        TransferEvent::upload(loaded, total)
    } else {
        TransferEvent::download(loaded, total)
    }
}

/// Upload both files. `on_event` receives upload and download progress.
pub async fn submit_match(
    pdf: &File,
    excel: &File,
    params: &SubmissionParameters,
    on_event: impl Fn(TransferEvent) + 'static,
) -> Result<MatchResponse> {
    let url = format!("{}/match?{}", api_base(), params.query_string());

    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("pdfFile", pdf, &pdf.name()).map_err(js_error)?;
    form.append_with_blob_and_filename("excelFile", excel, &excel.name()).map_err(js_error)?;

    let xhr = XmlHttpRequest::new().map_err(js_error)?;
    xhr.open_with_async("POST", &url, true).map_err(js_error)?;
    xhr.set_timeout(SUBMIT_TIMEOUT_MS);

    let on_event = Rc::new(on_event);
    let on_upload = {
        let on_event = on_event.clone();
        Closure::<dyn FnMut(ProgressEvent)>::new(move |ev: ProgressEvent| on_event(transfer_event(&ev, true)))
    };
    let on_download = {
        let on_event = on_event.clone();
        Closure::<dyn FnMut(ProgressEvent)>::new(move |ev: ProgressEvent| on_event(transfer_event(&ev, false)))
    };

    let (tx, rx) = oneshot::channel::<XhrEnd>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let finisher = |end: fn() -> XhrEnd| {
        let tx = tx.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(end());
            }
        })
    };
    let on_load = finisher(|| XhrEnd::Load);
    let on_error = finisher(|| XhrEnd::Error);
    let on_timeout = finisher(|| XhrEnd::Timeout);

    xhr.upload()
        .map_err(js_error)?
        .set_onprogress(Some(on_upload.as_ref().unchecked_ref()));
    xhr.set_onprogress(Some(on_download.as_ref().unchecked_ref()));
    xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));
    xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    xhr.set_ontimeout(Some(on_timeout.as_ref().unchecked_ref()));

    xhr.send_with_opt_form_data(Some(&form)).map_err(js_error)?;
    let end = rx.await.map_err(|_| Error::Network("request dropped".into()))?;

    // handlers must outlive the request
    drop((on_upload, on_download, on_load, on_error, on_timeout));

    match end {
        XhrEnd::Timeout => Err(Error::Timeout(u64::from(SUBMIT_TIMEOUT_MS / 1000))),
        XhrEnd::Error => Err(Error::Network("network error".into())),
        XhrEnd::Load => {
            let status = xhr.status().map_err(js_error)?;
            let body = xhr.response_text().map_err(js_error)?.unwrap_or_default();
            if !(200..300).contains(&status) {
                return Err(Error::Remote {
                    status,
                    message: RemoteErrorBody::message_from(body.as_bytes()),
                });
            }
            Ok(serde_json::from_str(&body)?)
        }
    }
}

async fn send(method: &str, path: &str) -> Result<String> {
    let url = format!("{}/{}", api_base(), path);

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
    let window = web_sys::window().ok_or_else(|| Error::Network("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;

    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();
    if !resp.ok() {
        return Err(Error::Remote {
            status: resp.status(),
            message: RemoteErrorBody::message_from(text.as_bytes()),
        });
    }
    Ok(text)
}

/// `GET /records`
pub async fn fetch_records() -> Result<Vec<Record>> {
    let text = send("GET", "records").await?;
    let records: Option<Vec<Record>> = serde_json::from_str(&text)?;
    Ok(records.unwrap_or_default())
}

/// `POST /clear-records`
pub async fn clear_records() -> Result<()> {
    send("POST", "clear-records").await?;
    Ok(())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use gazette_matcher_common::TransferPhase;
    use web_sys::ProgressEventInit;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn progress(loaded: f64, total: f64, computable: bool) -> ProgressEvent {
        let init = ProgressEventInit::new();
        init.set_loaded(loaded);
        init.set_total(total);
        init.set_length_computable(computable);
        ProgressEvent::new_with_event_init_dict("progress", &init).expect("progress event")
    }

    #[wasm_bindgen_test]
    fn wasm_unknown_total_is_none() {
        let event = transfer_event(&progress(512.0, 0.0, false), true);
        assert_eq!(event.phase, TransferPhase::Upload);
        assert_eq!(event.loaded, 512);
        assert_eq!(event.total, None);
    }

    #[wasm_bindgen_test]
    fn wasm_known_total_is_kept() {
        let event = transfer_event(&progress(100.0, 400.0, true), false);
        assert_eq!(event.phase, TransferPhase::Download);
        assert_eq!(event.total, Some(400));
    }
}
