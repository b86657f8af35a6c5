//! [`User`]-related [`Database`] implementations.

use std::collections::{BTreeSet, HashMap};

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::user::search,
};

/// Reads a [`User`] out of the provided [`Row`].
fn user_from(row: &Row) -> User {
    User {
        id: row.get("id"),
        login: row.get("login"),
        name: row.get("name"),
        email: row.get("email"),
        active: row.get("active"),
        local: row.get("local"),
        external_provider: row.get("external_provider"),
        external_login: row.get("external_login"),
        scm_accounts: row.get("scm_accounts"),
        connected_at: row.get("connected_at"),
    }
}

impl<C, Logins> Database<Select<By<HashMap<user::Login, User>, Logins>>>
    for Postgres<C>
where
    C: Connection,
    Logins: AsRef<[user::Login]>,
{
    type Ok = HashMap<user::Login, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Login, User>, Logins>>,
    ) -> Result<Self::Ok, Self::Err> {
        let logins = by.into_inner();
        // Avoid subtle change for SQL.
        let logins: &[user::Login] = logins.as_ref();
        if logins.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(logins.len()).unwrap();

        const SQL: &str = "\
            SELECT id, login, name, \
                   NULLIF(email, '') AS email, \
                   active, local, \
                   external_provider, external_login, \
                   scm_accounts, connected_at \
            FROM users \
            WHERE login IN (SELECT unnest($1::VARCHAR[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&logins, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let user = user_from(&row);
                (user.login.clone(), user)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, name, \
                   NULLIF(email, '') AS email, \
                   active, local, \
                   external_provider, external_login, \
                   scm_accounts, connected_at \
            FROM users \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| user_from(&row)))
    }
}

impl<C> Database<Select<By<search::ManagedFlags, BTreeSet<user::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = search::ManagedFlags;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::ManagedFlags, BTreeSet<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner().into_iter().collect::<Vec<_>>();
        if ids.is_empty() {
            return Ok(search::ManagedFlags::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT user_id \
            FROM managed_accounts \
            WHERE user_id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| (row.get("user_id"), true))
            .collect())
    }
}
