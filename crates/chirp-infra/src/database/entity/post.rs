//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use chirp_core::domain::{AuthorId, PostId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub author_id: String,
    pub created_at: DateTimeWithTimeZone,
    pub last_modified_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
///
/// Fails when the stored author id is not a valid [`AuthorId`].
impl TryFrom<Model> for chirp_core::domain::Post {
    type Error = chirp_core::error::RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let author_id = AuthorId::parse(&model.author_id).map_err(|e| {
            chirp_core::error::RepoError::Query(format!("corrupt row {}: {e}", model.id))
        })?;

        Ok(Self {
            id: PostId::new(model.id),
            text: model.text,
            author_id,
            created_at: model.created_at.into(),
            last_modified_at: model.last_modified_at.map(Into::into),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<chirp_core::domain::Post> for ActiveModel {
    fn from(post: chirp_core::domain::Post) -> Self {
        Self {
            id: Set(post.id.as_str().to_owned()),
            text: Set(post.text),
            author_id: Set(post.author_id.as_str().to_owned()),
            created_at: Set(post.created_at.into()),
            last_modified_at: Set(post.last_modified_at.map(Into::into)),
        }
    }
}
