//! Request tracing: one [`TraceId`] per request, echoed as a `Trace-Id`
//! response header and attached to the request's access log line.
//!
//! Notification tasks spawned by a handler capture the id themselves with
//! [`TraceId::current`]; see [`crate::domain::notification`].

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use tracing::{error, info};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Run the rest of the chain inside a fresh trace scope.
///
/// # Examples
/// ```
/// use actix_web::{App, middleware::from_fn};
/// use keyledger::middleware::trace_request;
///
/// let app = App::new().wrap(from_fn(trace_request));
/// ```
pub async fn trace_request(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse, Error> {
    let trace_id = TraceId::generate();
    let method = req.method().clone();
    let path = req.path().to_owned();

    let mut res = TraceId::scope(trace_id, next.call(req)).await?;

    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => error!(%error, %trace_id, "trace id is not a valid header value"),
    }
    info!(%trace_id, %method, path = %path, status = res.status().as_u16(), "request handled");
    Ok(res.map_into_boxed_body())
}
