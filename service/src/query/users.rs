//! [`Query`] collection related to the multiple [`User`]s.

use std::collections::{BTreeSet, HashMap};

use common::{
    operations::{By, Select},
    Paging,
};
use derive_more::{Display, Error as StdError, From};
use futures::future;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{self, Session, Visibility},
        User,
    },
    infra::{database, index, Avatars, Database, Index},
    read::user::search,
    Query, Service,
};

/// [`Query`] searching [`User`]s on behalf of a [`Session`].
///
/// The search index decides which [`User`]s match the [`search::Criteria`]
/// and in what order, the database provides their authoritative records, and
/// the [`Visibility`] of every record for the [`Session`] decides which of
/// its fields are exposed.
#[derive(Clone, Debug)]
pub struct Search {
    /// [`search::Criteria`] of this [`Search`].
    pub criteria: search::Criteria,

    /// [`Session`] on whose behalf this [`Search`] is executed.
    pub session: Session,
}

impl<Db, Idx, Av> Query<Search> for Service<Db, Idx, Av>
where
    Db: Database<
            Select<By<HashMap<user::Login, User>, Vec<user::Login>>>,
            Ok = HashMap<user::Login, User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<search::GroupsByLogin, Vec<user::Login>>>,
            Ok = search::GroupsByLogin,
            Err = Traced<database::Error>,
        > + for<'u> Database<
            Select<By<search::TokenCounts, &'u [User]>>,
            Ok = search::TokenCounts,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<search::ManagedFlags, BTreeSet<user::Id>>>,
            Ok = search::ManagedFlags,
            Err = Traced<database::Error>,
        >,
    Idx: Index<
        Select<By<search::Hits, search::Selector>>,
        Ok = search::Hits,
        Err = Traced<index::Error>,
    >,
    Av: Avatars,
{
    type Ok = search::Page;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Search { criteria, session }: Search,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let search::Hits { logins, total } = self
            .index()
            .execute(Select(By::<search::Hits, _>::new(
                search::Selector::from(&criteria),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (mut by_login, mut groups) = future::try_join(
            self.database().execute(Select(By::<
                HashMap<user::Login, User>,
                _,
            >::new(logins.clone()))),
            self.database()
                .execute(Select(By::<search::GroupsByLogin, _>::new(
                    logins.clone(),
                ))),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // The index dictates only the ordering. Hits the database doesn't
        // recognize anymore are dropped, while `total` still reflects the
        // index's count.
        let users = logins
            .iter()
            .filter_map(|login| by_login.remove(login))
            .collect::<Vec<_>>();
        if users.len() < logins.len() {
            log::trace!(
                "{} of {} hits are missing in the database",
                logins.len() - users.len(),
                logins.len(),
            );
        }

        let ids = users.iter().map(|u| u.id).collect::<BTreeSet<_>>();
        let (mut tokens, managed) = future::try_join(
            self.database()
                .execute(Select(By::<search::TokenCounts, _>::new(
                    users.as_slice(),
                ))),
            self.database()
                .execute(Select(By::<search::ManagedFlags, _>::new(ids))),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let paging = Paging::new(criteria.page, criteria.page_size, total);
        let nodes = users
            .into_iter()
            .map(|user| {
                let visibility = Visibility::of(&session, &user);
                let avatar = Some(self.avatars().resolve(&user));
                let groups = groups.remove(&user.login).unwrap_or_default();
                let tokens_count =
                    tokens.remove(&user.login).unwrap_or_default();
                let managed =
                    managed.get(&user.id).copied().unwrap_or_default();
                search::Record::new(
                    user, visibility, avatar, groups, tokens_count, managed,
                )
            })
            .collect();

        Ok(search::Page { nodes, paging })
    }
}

/// Error of a [`Search`] [`Query`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Search [`Index`] error.
    #[display("Search `Index` operation failed: {_0}")]
    Index(index::Error),
}
