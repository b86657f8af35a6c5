//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::{session, Session},
};

use crate::{define_error, AsError, Error, Service};

/// Application context of a handled HTTP request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Session`] the handled HTTP request is performed on behalf of.
    session: Session,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`Session`] the handled HTTP request is performed on
    /// behalf of.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        // A missing `Authorization` header represents an anonymous caller,
        // while a present but invalid one is rejected.
        let session = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                service
                    .execute(command::AuthorizeUserSession { token })
                    .await
                    .map_err(AsError::into_error)?
            }
            Err(e) => {
                if e.is_missing() {
                    Session::Anonymous
                } else {
                    return Err(e.into_error());
                }
            }
        };

        Ok(Self { service, session })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_)
            | Self::UserDeactivated(_)
            | Self::UserNotExists(_) => Some(AuthError::InvalidToken.into()),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHENTICATION_FAILED"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired authentication token"]
        InvalidToken,
    }
}
