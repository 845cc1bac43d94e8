//! Contact message entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A message left through the public contact form.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub email: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    #[sea_orm(default_value = false)]
    pub read: bool,

    #[sea_orm(indexed)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
