//! Radix-tree request router.
//!
//! One tree per HTTP method, a fallback for everything unmatched, and the
//! application state handed to each handler call. [`Router::handle`] is the
//! whole request pipeline minus the socket: method override, lookup, handler,
//! error responder.
//!
//! Lookup ignores a trailing slash (`/listings/` finds `/listings`). A `HEAD`
//! request with no `HEAD` route runs the `GET` handler and drops the body.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::method_override;
use crate::request::Request;
use crate::responder;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup with the state every handler receives; pass it
/// to [`Server::serve`](crate::Server::serve). Each [`Router::on`] call
/// returns `self` so registrations chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    fallback: BoxedHandler<S>,
    state: S,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// An empty router whose fallback forwards `404 Page not found`.
    pub fn new(state: S) -> Self {
        Self {
            routes: HashMap::new(),
            fallback: responder::not_found::<S>.into_boxed_handler(),
            state,
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them. Static segments win over parameters, so `/listings/new` and
    /// `/listings/{id}` coexist.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with a registered route.
    /// Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Replace the handler used when no route matches.
    pub fn fallback(mut self, handler: impl Handler<S>) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    pub fn state(&self) -> &S { &self.state }

    /// Runs one request through the pipeline and produces exactly one
    /// response.
    pub async fn handle(&self, mut req: Request) -> Response {
        method_override::apply(&mut req);
        let head = req.method() == Method::HEAD;

        let handler = match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler
            }
            None => Arc::clone(&self.fallback),
        };

        let res = match handler.call(req, self.state.clone()).await {
            Ok(res) => res,
            Err(err) => responder::respond(err),
        };
        if head { res.without_body() } else { res }
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let matched = self
            .routes
            .get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| {
                if *method != Method::HEAD {
                    return None;
                }
                self.routes.get(&Method::GET)?.at(path).ok()
            })?;

        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::error::{AppError, Error};

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    async fn new_form(_req: Request, _: ()) -> Result<&'static str, Error> {
        Ok("new")
    }

    async fn show(req: Request, _: ()) -> Result<String, Error> {
        Ok(format!("show {}", req.param("id").unwrap_or_default()))
    }

    async fn gone(_req: Request, _: ()) -> Result<Response, Error> {
        Err(AppError::new(StatusCode::GONE, "gone").into())
    }

    fn router() -> Router<()> {
        Router::new(())
            .on(Method::GET, "/listings/new", new_form)
            .on(Method::GET, "/listings/{id}", show)
            .on(Method::DELETE, "/listings/{id}", gone)
    }

    #[tokio::test]
    async fn static_segment_wins_over_param() {
        let res = router().handle(request(Method::GET, "/listings/new")).await;
        assert_eq!(res.text_body(), "new");

        let res = router().handle(request(Method::GET, "/listings/42")).await;
        assert_eq!(res.text_body(), "show 42");
    }

    #[tokio::test]
    async fn unmatched_path_hits_fallback() {
        let res = router().handle(request(Method::GET, "/nowhere")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.text_body(), "Page not found");
    }

    #[tokio::test]
    async fn known_path_with_unknown_method_hits_fallback() {
        let res = router().handle(request(Method::PATCH, "/listings/42")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_error_reaches_responder() {
        let res = router().handle(request(Method::DELETE, "/listings/42")).await;
        assert_eq!(res.status(), StatusCode::GONE);
        assert_eq!(res.text_body(), "gone");
    }

    #[tokio::test]
    async fn trailing_slash_finds_the_route() {
        let res = router().handle(request(Method::GET, "/listings/new/")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text_body(), "new");
    }

    #[tokio::test]
    async fn head_runs_get_without_body() {
        let res = router().handle(request(Method::HEAD, "/listings/42")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn head_on_unknown_path_is_an_empty_404() {
        let res = router().handle(request(Method::HEAD, "/nowhere")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn custom_fallback_replaces_default() {
        async fn teapot(_req: Request, _: ()) -> Result<StatusCode, Error> {
            Ok(StatusCode::IM_A_TEAPOT)
        }
        let res = router().fallback(teapot).handle(request(Method::GET, "/x")).await;
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    }
}
