use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub content: Option<String>,

    /// Sort key only. No uniqueness is enforced; ties are broken by id.
    pub section_order: i32,

    pub ebook_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ebooks::Entity",
        from = "Column::EbookId",
        to = "super::ebooks::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ebooks,
}

impl Related<super::ebooks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ebooks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
