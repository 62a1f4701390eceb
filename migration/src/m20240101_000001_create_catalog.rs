use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(pk_auto(Countries::Id))
                    .col(string_uniq(Countries::Code))
                    .col(string_null(Countries::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(pk_auto(Genres::Id))
                    .col(string_uniq(Genres::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(pk_auto(Actors::Id))
                    .col(string_uniq(Actors::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Languages::Table)
                    .if_not_exists()
                    .col(pk_auto(Languages::Id))
                    .col(string_uniq(Languages::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string_len(Movies::Name, 255))
                    .col(string_len(Movies::Date, 10))
                    .col(double(Movies::Score))
                    .col(text(Movies::Overview))
                    .col(string(Movies::Status))
                    .col(double(Movies::Budget))
                    .col(double(Movies::Revenue))
                    .col(integer(Movies::CountryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_country")
                            .from(Movies::Table, Movies::CountryId)
                            .to(Countries::Table, Countries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_name_date")
                    .table(Movies::Table)
                    .col(Movies::Name)
                    .col(Movies::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MoviesGenres::Table)
                    .if_not_exists()
                    .col(integer(MoviesGenres::MovieId))
                    .col(integer(MoviesGenres::GenreId))
                    .primary_key(
                        Index::create().col(MoviesGenres::MovieId).col(MoviesGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_genres_movie")
                            .from(MoviesGenres::Table, MoviesGenres::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_genres_genre")
                            .from(MoviesGenres::Table, MoviesGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActorsMovies::Table)
                    .if_not_exists()
                    .col(integer(ActorsMovies::MovieId))
                    .col(integer(ActorsMovies::ActorId))
                    .primary_key(
                        Index::create().col(ActorsMovies::MovieId).col(ActorsMovies::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actors_movies_movie")
                            .from(ActorsMovies::Table, ActorsMovies::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actors_movies_actor")
                            .from(ActorsMovies::Table, ActorsMovies::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MoviesLanguages::Table)
                    .if_not_exists()
                    .col(integer(MoviesLanguages::MovieId))
                    .col(integer(MoviesLanguages::LanguageId))
                    .primary_key(
                        Index::create()
                            .col(MoviesLanguages::MovieId)
                            .col(MoviesLanguages::LanguageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_languages_movie")
                            .from(MoviesLanguages::Table, MoviesLanguages::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_languages_language")
                            .from(MoviesLanguages::Table, MoviesLanguages::LanguageId)
                            .to(Languages::Table, Languages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MoviesLanguages::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ActorsMovies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MoviesGenres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Languages::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Countries::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Languages {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Name,
    Date,
    Score,
    Overview,
    Status,
    Budget,
    Revenue,
    CountryId,
}

#[derive(DeriveIden)]
enum MoviesGenres {
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum ActorsMovies {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum MoviesLanguages {
    Table,
    MovieId,
    LanguageId,
}
