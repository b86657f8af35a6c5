//! [`Command`] for authorizing a [`User`]'s [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`]'s [`Session`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`session::Token`] to authorize.
    pub token: session::Token,
}

impl<Db, Idx, Av> Command<AuthorizeUserSession> for Service<Db, Idx, Av>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let claims = jsonwebtoken::decode::<session::Claims>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let user = self
            .database()
            .execute(Select(By::new(claims.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(claims.user_id))
            .map_err(tracerr::wrap!())?;
        if !user.active {
            return Err(tracerr::new!(E::UserDeactivated(claims.user_id)));
        }

        Ok(Session::Authenticated(claims))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to is deactivated.
    #[display("`User(id: {_0})` is deactivated")]
    #[from(ignore)]
    UserDeactivated(#[error(not(source))] user::Id),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        DateTime,
    };
    use jsonwebtoken::{DecodingKey, EncodingKey, Header};
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{
            user::{self, session::Claims, Session},
            User,
        },
        infra::{database, Database, EmailHashes},
        Config, Service,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    const SECRET: &[u8] = b"authorization-secret";

    /// Identity store stand-in always resolving to the same [`User`].
    #[derive(Clone, Debug)]
    struct Db(Option<User>);

    impl Database<Select<By<Option<User>, user::Id>>> for Db {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.0.clone())
        }
    }

    fn service(db: Db) -> Service<Db, (), EmailHashes> {
        Service::new(
            Config {
                jwt_decoding_key: DecodingKey::from_secret(SECRET),
            },
            db,
            (),
            EmailHashes,
        )
    }

    fn user(active: bool) -> User {
        User {
            id: user::Id::from(Uuid::from_u128(1)),
            login: "alice".parse().unwrap(),
            name: "Alice".parse().unwrap(),
            email: None,
            active,
            local: true,
            external_provider: None,
            external_login: None,
            scm_accounts: vec![],
            connected_at: None,
        }
    }

    fn claims(expires_in_secs: i64) -> Claims {
        Claims {
            user_id: user::Id::from(Uuid::from_u128(1)),
            system_administrator: false,
            expires_at: DateTime::from_unix_timestamp(
                DateTime::now().unix_timestamp() + expires_in_secs,
            )
            .unwrap()
            .coerce(),
        }
    }

    fn token(claims: &Claims) -> AuthorizeUserSession {
        AuthorizeUserSession {
            token: jsonwebtoken::encode(
                &Header::default(),
                claims,
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap()
            .parse()
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn authorizes_valid_token() {
        let claims = claims(3600);

        let session = service(Db(Some(user(true))))
            .execute(token(&claims))
            .await
            .unwrap();

        assert_eq!(session, Session::Authenticated(claims));
        assert!(session.is_authenticated());
        assert!(!session.is_system_administrator());
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let claims = claims(-3600);

        let err = service(Db(Some(user(true))))
            .execute(token(&claims))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let cmd = AuthorizeUserSession {
            token: "not-a-json-web-token".parse().unwrap(),
        };

        let err = service(Db(Some(user(true))))
            .execute(cmd)
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let err = service(Db(None))
            .execute(token(&claims(3600)))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_deactivated_user() {
        let err = service(Db(Some(user(false))))
            .execute(token(&claims(3600)))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserDeactivated(_)));
    }
}
