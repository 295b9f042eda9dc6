use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::VerifiedIdentity;
use crate::error::AppError;

/// The verified caller of the current request.
///
/// Read from the identity the `JwtExtract` middleware attached to request
/// extensions; fails with `MissingCredential` on routes without it.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl From<VerifiedIdentity> for CurrentUser {
    fn from(identity: VerifiedIdentity) -> Self {
        Self {
            id: identity.subject_id,
            email: identity.email,
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<VerifiedIdentity>().cloned();
        ready(identity.map(CurrentUser::from).ok_or(AppError::MissingCredential))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn reads_identity_from_extensions() {
        let id = Uuid::new_v4();
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(VerifiedIdentity {
            subject_id: id,
            email: "a@example.com".into(),
            issued_at: 1,
            expires_at: 2,
        });

        let user = CurrentUser::extract(&req).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "a@example.com");
    }

    #[actix_web::test]
    async fn missing_identity_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = CurrentUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
    }
}
