//! Token-count [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::User,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::user::search,
};

impl<'u, C> Database<Select<By<search::TokenCounts, &'u [User]>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = search::TokenCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::TokenCounts, &'u [User]>>,
    ) -> Result<Self::Ok, Self::Err> {
        let users = by.into_inner();
        if users.is_empty() {
            return Ok(search::TokenCounts::new());
        }
        let ids = users.iter().map(|u| u.id).collect::<Vec<_>>();
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT u.login, COUNT(t.id)::INT4 AS tokens \
            FROM user_tokens t \
                 JOIN users u ON u.id = t.user_id \
            WHERE t.user_id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            GROUP BY u.login";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| (row.get("login"), row.get::<_, i32>("tokens").into()))
            .collect())
    }
}
