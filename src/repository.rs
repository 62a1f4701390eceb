use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::{
    entities::{actor, country, genre, language, movie, movie_actor, movie_genre, movie_language},
    error::{AppError, AppResult},
    pagination::PageRequest,
    schemas::{MovieChanges, MovieDetail, MovieListItem, NewMovie},
    validation::Valid,
};

fn movie_not_found() -> AppError {
    AppError::NotFound("Movie with the given ID was not found.".to_string())
}

/// One page of movies, newest first, plus the size of the whole catalog.
pub async fn list_movies<C: ConnectionTrait>(
    conn: &C,
    page: PageRequest,
) -> AppResult<(Vec<MovieListItem>, u64)> {
    let total_items = movie::Entity::find().count(conn).await?;
    let movies = movie::Entity::find()
        .order_by_desc(movie::Column::Id)
        .offset(page.offset())
        .limit(page.per_page())
        .all(conn)
        .await?
        .into_iter()
        .map(MovieListItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((movies, total_items))
}

pub async fn get_movie<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<MovieDetail> {
    let movie = movie::Entity::find_by_id(id).one(conn).await?.ok_or_else(movie_not_found)?;
    load_detail(conn, movie).await
}

async fn load_detail<C: ConnectionTrait>(conn: &C, movie: movie::Model) -> AppResult<MovieDetail> {
    let country = movie
        .find_related(country::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("movie {} references a missing country", movie.id))?;
    let genres = movie.find_related(genre::Entity).order_by_asc(genre::Column::Id).all(conn).await?;
    let actors = movie.find_related(actor::Entity).order_by_asc(actor::Column::Id).all(conn).await?;
    let languages =
        movie.find_related(language::Entity).order_by_asc(language::Column::Id).all(conn).await?;

    Ok(MovieDetail::project(movie, country, genres, actors, languages)?)
}

async fn find_or_create_country<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> AppResult<country::Model> {
    let existing =
        country::Entity::find().filter(country::Column::Code.eq(code)).one(conn).await?;
    if let Some(country) = existing {
        return Ok(country);
    }

    let model = country::ActiveModel {
        code: Set(code.to_string()),
        name: Set(None),
        ..Default::default()
    };
    Ok(model.insert(conn).await?)
}

/// Resolves each name to its lookup row, inserting missing ones. Repeated
/// names collapse to a single row; the first occurrence decides the order.
macro_rules! find_or_create_named {
    ($fn_name:ident, $entity:ident) => {
        async fn $fn_name<C: ConnectionTrait>(
            conn: &C,
            names: &[String],
        ) -> AppResult<Vec<$entity::Model>> {
            let mut out: Vec<$entity::Model> = Vec::with_capacity(names.len());
            for name in names {
                if out.iter().any(|m| &m.name == name) {
                    continue;
                }
                let existing = $entity::Entity::find()
                    .filter($entity::Column::Name.eq(name.as_str()))
                    .one(conn)
                    .await?;
                let model = match existing {
                    Some(model) => model,
                    None => {
                        let model =
                            $entity::ActiveModel { name: Set(name.clone()), ..Default::default() };
                        model.insert(conn).await?
                    },
                };
                out.push(model);
            }
            Ok(out)
        }
    };
}

find_or_create_named!(find_or_create_genres, genre);
find_or_create_named!(find_or_create_actors, actor);
find_or_create_named!(find_or_create_languages, language);

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    date: &str,
    except_id: Option<i32>,
) -> AppResult<()> {
    let mut query = movie::Entity::find()
        .filter(movie::Column::Name.eq(name))
        .filter(movie::Column::Date.eq(date));
    if let Some(id) = except_id {
        query = query.filter(movie::Column::Id.ne(id));
    }

    if query.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A movie with the name '{name}' and release date '{date}' already exists."
        )));
    }
    Ok(())
}

pub async fn create_movie<C: ConnectionTrait>(
    conn: &C,
    movie: Valid<NewMovie>,
) -> AppResult<MovieDetail> {
    let movie = movie.into_inner();
    let date = movie.date.to_string();
    ensure_unique(conn, &movie.name, &date, None).await?;

    let country = find_or_create_country(conn, &movie.country).await?;
    let genres = find_or_create_genres(conn, &movie.genres).await?;
    let actors = find_or_create_actors(conn, &movie.actors).await?;
    let languages = find_or_create_languages(conn, &movie.languages).await?;

    let created = movie::ActiveModel {
        name: Set(movie.name),
        date: Set(date),
        score: Set(movie.score),
        overview: Set(movie.overview),
        status: Set(movie.status),
        budget: Set(movie.budget),
        revenue: Set(movie.revenue),
        country_id: Set(country.id),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    for g in &genres {
        let link = movie_genre::ActiveModel { movie_id: Set(created.id), genre_id: Set(g.id) };
        movie_genre::Entity::insert(link).exec_without_returning(conn).await?;
    }
    for a in &actors {
        let link = movie_actor::ActiveModel { movie_id: Set(created.id), actor_id: Set(a.id) };
        movie_actor::Entity::insert(link).exec_without_returning(conn).await?;
    }
    for l in &languages {
        let link =
            movie_language::ActiveModel { movie_id: Set(created.id), language_id: Set(l.id) };
        movie_language::Entity::insert(link).exec_without_returning(conn).await?;
    }

    debug!(movie_id = created.id, name = %created.name, "created movie");
    Ok(MovieDetail::project(created, country, genres, actors, languages)?)
}

/// Writes only the fields present in `changes`.
pub async fn update_movie<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    changes: Valid<MovieChanges>,
) -> AppResult<()> {
    let existing = movie::Entity::find_by_id(id).one(conn).await?.ok_or_else(movie_not_found)?;
    let changes = changes.into_inner();

    if changes.name.is_some() || changes.date.is_some() {
        let name = changes.name.as_deref().unwrap_or(&existing.name);
        let date = changes.date.map(|d| d.to_string()).unwrap_or_else(|| existing.date.clone());
        ensure_unique(conn, name, &date, Some(id)).await?;
    }

    let mut active: movie::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(date) = changes.date {
        active.date = Set(date.to_string());
    }
    if let Some(score) = changes.score {
        active.score = Set(score);
    }
    if let Some(overview) = changes.overview {
        active.overview = Set(overview);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(budget) = changes.budget {
        active.budget = Set(budget);
    }
    if let Some(revenue) = changes.revenue {
        active.revenue = Set(revenue);
    }

    if active.is_changed() {
        active.update(conn).await?;
        debug!(movie_id = id, "updated movie");
    }
    Ok(())
}

pub async fn delete_movie<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<()> {
    let result = movie::Entity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(movie_not_found());
    }
    debug!(movie_id = id, "deleted movie");
    Ok(())
}
