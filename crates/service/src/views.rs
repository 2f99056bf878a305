//! Serializable shapes handed to the rendering layer.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use models::{comment, group, post, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Page;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
}

impl From<&user::Model> for AuthorView {
    fn from(u: &user::Model) -> Self {
        let full_name = format!("{} {}", u.first_name, u.last_name).trim().to_string();
        Self { id: u.id, username: u.username.clone(), full_name }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<FixedOffset>,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub created: DateTime<FixedOffset>,
}

impl CommentView {
    pub fn new(c: comment::Model, author: Option<user::Model>) -> Self {
        Self {
            id: c.id,
            author: author.map(|a| a.username).unwrap_or_default(),
            text: c.text,
            created: c.created,
        }
    }
}

fn post_view(p: post::Model, authors: &HashMap<Uuid, String>, groups: &HashMap<Uuid, GroupRef>) -> PostView {
    PostView {
        id: p.id,
        author: authors.get(&p.author_id).cloned().unwrap_or_default(),
        group: p.group_id.and_then(|g| groups.get(&g).cloned()),
        text: p.text,
        pub_date: p.pub_date,
        image: p.image,
    }
}

/// Resolve authors and groups of a page of posts with one query each.
pub async fn attach_relations(db: &DatabaseConnection, page: Page<post::Model>) -> Result<Page<PostView>, ServiceError> {
    let author_ids: Vec<Uuid> = page.iter().map(|p| p.author_id).collect();
    let group_ids: Vec<Uuid> = page.iter().filter_map(|p| p.group_id).collect();

    let authors: HashMap<Uuid, String> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };
    let groups: HashMap<Uuid, GroupRef> = if group_ids.is_empty() {
        HashMap::new()
    } else {
        group::Entity::find()
            .filter(group::Column::Id.is_in(group_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|g| (g.id, GroupRef { slug: g.slug, title: g.title }))
            .collect()
    };

    Ok(page.map(|p| post_view(p, &authors, &groups)))
}

/// Single-post variant of [`attach_relations`].
pub fn single_post_view(p: post::Model, author: &user::Model, group: Option<&group::Model>) -> PostView {
    let authors = HashMap::from([(author.id, author.username.clone())]);
    let groups: HashMap<Uuid, GroupRef> = group
        .map(|g| (g.id, GroupRef { slug: g.slug.clone(), title: g.title.clone() }))
        .into_iter()
        .collect();
    post_view(p, &authors, &groups)
}
