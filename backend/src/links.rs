//! Route templates and HAL link assembly for users.
//!
//! The router registers its paths from the same [`RouteTable`] the
//! assembler derives hrefs from, so links cannot drift from dispatch.

use users_common::{CollectionModel, EntityModel, User, SELF_REL};

use crate::config::Config;

/// Placeholder for the user id in the item template (axum path syntax).
const ID_PARAM: &str = ":id";

/// Relation from a single user back to the collection.
pub const USERS_REL: &str = "users";
/// Key under `_embedded` holding collection items.
pub const USER_LIST_REL: &str = "userList";

/// Path templates for the users resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    collection: String,
}

impl RouteTable {
    /// `collection` is normalised to a single leading slash and no trailing one.
    pub fn new(collection: &str) -> Self {
        let trimmed = collection.trim_matches('/');
        Self {
            collection: format!("/{}", trimmed),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.routes.users_path)
    }

    /// `/users`
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// `/users/:id`
    pub fn item(&self) -> String {
        format!("{}/{}", self.collection, ID_PARAM)
    }

    /// `/users/search`
    pub fn search(&self) -> String {
        format!("{}/search", self.collection)
    }

    /// Concrete path of one user.
    pub fn item_path(&self, id: i64) -> String {
        self.item().replace(ID_PARAM, &id.to_string())
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new("/users")
    }
}

/// Wraps users into HAL representations.
#[derive(Debug, Clone)]
pub struct UserModelAssembler {
    routes: RouteTable,
    base_url: String,
}

impl UserModelAssembler {
    pub fn new(routes: RouteTable, base_url: &str) -> Self {
        Self {
            routes,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RouteTable::from_config(config), &config.links.base_url)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn href(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// href of a single user.
    pub fn item_href(&self, id: i64) -> String {
        self.href(&self.routes.item_path(id))
    }

    /// href of the users collection.
    pub fn collection_href(&self) -> String {
        self.href(self.routes.collection())
    }

    /// One user with `self` and `users` links.
    ///
    /// A user without id only gets the `users` link.
    pub fn to_model(&self, user: User) -> EntityModel<User> {
        let id = user.id;
        let model = EntityModel::new(user);
        let model = match id {
            Some(id) => model.with_link(SELF_REL, self.item_href(id)),
            None => model,
        };
        model.with_link(USERS_REL, self.collection_href())
    }

    /// Many users under `_embedded.userList` with a `self` link to the collection.
    pub fn to_collection_model(&self, users: Vec<User>) -> CollectionModel<User> {
        let items = users.into_iter().map(|user| self.to_model(user)).collect();
        CollectionModel::new(USER_LIST_REL, items).with_link(SELF_REL, self.collection_href())
    }
}

impl Default for UserModelAssembler {
    fn default() -> Self {
        Self::new(RouteTable::default(), "")
    }
}
