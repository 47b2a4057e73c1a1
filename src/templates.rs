//! Server-rendered pages.

use askama::Template;
use axum::response::Html;
use model::entities::treasure;
use model::store::OwnedTreasure;

use crate::error::AppError;
use crate::forms::{FieldError, FormErrors, TreasureForm};

/// A treasure as shown on a page.
#[derive(Debug, Clone)]
pub struct TreasureView {
    pub id: i32,
    pub name: String,
    pub value: String,
    pub material: String,
    pub location: String,
    pub likes: i32,
    pub owner: String,
}

impl TreasureView {
    pub fn new(treasure: treasure::Model, owner: String) -> Self {
        Self {
            id: treasure.id,
            name: treasure.name,
            value: format!("{:.2}", treasure.value),
            material: treasure.material,
            location: treasure.location,
            likes: treasure.likes,
            owner,
        }
    }
}

impl From<OwnedTreasure> for TreasureView {
    fn from(owned: OwnedTreasure) -> Self {
        Self::new(owned.treasure, owned.owner)
    }
}

/// The submission form as rendered: previous input plus any errors.
#[derive(Debug, Clone, Default)]
pub struct TreasureFormView {
    pub name: String,
    pub value: String,
    pub material: String,
    pub location: String,
    pub errors: Vec<FieldError>,
}

impl TreasureFormView {
    pub fn rejected(form: &TreasureForm, errors: FormErrors) -> Self {
        let echo = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            name: echo(&form.name),
            value: echo(&form.value),
            material: echo(&form.material),
            location: echo(&form.location),
            errors: errors.errors,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_user: Option<String>,
    pub treasures: Vec<TreasureView>,
    pub form: TreasureFormView,
}

impl IndexTemplate {
    pub fn new(
        current_user: Option<String>,
        treasures: Vec<OwnedTreasure>,
        form: TreasureFormView,
    ) -> Self {
        Self {
            current_user,
            treasures: treasures.into_iter().map(TreasureView::from).collect(),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "show.html")]
pub struct ShowTemplate {
    pub current_user: Option<String>,
    pub treasure: TreasureView,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<String>,
    pub username: String,
    pub treasures: Vec<TreasureView>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<String>,
    pub username: String,
    pub errors: Vec<String>,
}

impl LoginTemplate {
    pub fn new(current_user: Option<String>) -> Self {
        Self {
            current_user,
            username: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn invalid(current_user: Option<String>, username: String, errors: Vec<String>) -> Self {
        Self {
            current_user,
            username,
            errors,
        }
    }

    /// The form after the credentials themselves were refused.
    pub fn rejected(current_user: Option<String>, username: String, message: &str) -> Self {
        Self::invalid(current_user, username, vec![message.to_string()])
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub current_user: Option<String>,
    pub what: String,
}

impl NotFoundTemplate {
    pub fn new(current_user: Option<String>, what: String) -> Self {
        Self { current_user, what }
    }
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}
