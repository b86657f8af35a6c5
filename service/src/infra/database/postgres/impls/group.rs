//! Group-membership [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::user,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::user::search,
};

impl<C, Logins> Database<Select<By<search::GroupsByLogin, Logins>>>
    for Postgres<C>
where
    C: Connection,
    Logins: AsRef<[user::Login]>,
{
    type Ok = search::GroupsByLogin;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::GroupsByLogin, Logins>>,
    ) -> Result<Self::Ok, Self::Err> {
        let logins = by.into_inner();
        // Avoid subtle change for SQL.
        let logins: &[user::Login] = logins.as_ref();
        if logins.is_empty() {
            return Ok(search::GroupsByLogin::new());
        }
        let limit = i32::try_from(logins.len()).unwrap();

        const SQL: &str = "\
            SELECT u.login, g.name \
            FROM groups_users gu \
                 JOIN users u ON u.id = gu.user_id \
                 JOIN groups g ON g.id = gu.group_id \
            WHERE u.login IN (SELECT unnest($1::VARCHAR[]) LIMIT $2::INT4)";
        Ok(self
            .query(SQL, &[&logins, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .fold(search::GroupsByLogin::new(), |mut acc, row| {
                let _ = acc
                    .entry(row.get("login"))
                    .or_default()
                    .insert(row.get("name"));
                acc
            }))
    }
}
