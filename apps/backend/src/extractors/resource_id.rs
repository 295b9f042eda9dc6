use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::ownership::ResourceKind;

/// Id of the resource named in the route path.
///
/// Looks for the first resource path parameter (`photo_id`, `comment_id`,
/// `socialmedia_id`) and parses it as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub id: Uuid,
}

impl FromRequest for ResourceId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let found = ResourceKind::ALL
            .into_iter()
            .find_map(|kind| req.match_info().get(kind.path_param()).map(|raw| (kind, raw)));

        let result = match found {
            Some((kind, raw)) => Uuid::parse_str(raw)
                .map(|id| ResourceId { kind, id })
                .map_err(|_| AppError::InvalidResourceId),
            None => Err(AppError::internal("route has no resource id parameter")),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App, HttpResponse};

    use super::*;

    async fn echo(id: ResourceId) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{}", id.kind, id.id))
    }

    #[actix_web::test]
    async fn parses_named_path_parameter() {
        let app = test::init_service(
            App::new()
                .route("/comments/{comment_id}", web::put().to(echo))
                .route("/plain/{other}", web::put().to(echo)),
        )
        .await;

        let id = Uuid::new_v4();
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/comments/{id}"))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, format!("comment:{id}"));

        let resp = test::call_service(
            &app,
            test::TestRequest::put().uri("/comments/nope").to_request(),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 400);

        let resp = test::call_service(
            &app,
            test::TestRequest::put().uri("/plain/x").to_request(),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 500);
    }
}
