use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use sea_orm::Iterable;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub score: f64,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub revenue: f64,
    pub country_id: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MovieStatus {
    #[sea_orm(string_value = "Released")]
    #[serde(rename = "Released")]
    Released,
    #[sea_orm(string_value = "Post Production")]
    #[serde(rename = "Post Production")]
    PostProduction,
    #[sea_orm(string_value = "In Production")]
    #[serde(rename = "In Production")]
    InProduction,
}

impl MovieStatus {
    /// Matches the stored label exactly.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }

    /// Every accepted label, quoted and comma-separated.
    pub fn labels() -> String {
        Self::iter().map(|s| format!("'{}'", s.to_value())).collect::<Vec<_>>().join(", ")
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id",
        on_delete = "Restrict"
    )]
    Country,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_genre::Relation::Movie.def().rev())
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Actor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Movie.def().rev())
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_language::Relation::Language.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_language::Relation::Movie.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
