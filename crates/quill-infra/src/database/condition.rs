//! Translation of post predicates into SeaQuery conditions.
//!
//! Conditions reference `posts` and `categories` columns, so the select
//! they filter must join the category relation.

use sea_orm::QueryFilter;
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, SimpleExpr};

use quill_core::query::{PostField, Predicate};

use super::entity::{category, post};

const LIKE_ESCAPE: char = '\\';

/// Filter `query` by `predicate`. `Always` leaves the query untouched.
pub fn apply<Q: QueryFilter>(query: Q, predicate: &Predicate) -> Q {
    if predicate.is_always() {
        query
    } else {
        query.filter(to_condition(predicate))
    }
}

pub fn to_condition(predicate: &Predicate) -> Condition {
    match predicate {
        Predicate::Always => Condition::all(),
        Predicate::Contains { field, needle } => {
            let pattern = format!("%{}%", escape_like(needle));
            Condition::all().add(
                Expr::expr(Func::lower(column(*field)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
        }
        Predicate::Equals { field, value } => {
            Condition::all().add(Expr::expr(column(*field)).eq(value.as_str()))
        }
        Predicate::And(a, b) => Condition::all()
            .add(to_condition(a))
            .add(to_condition(b)),
        Predicate::Or(a, b) => Condition::any()
            .add(to_condition(a))
            .add(to_condition(b)),
    }
}

fn column(field: PostField) -> SimpleExpr {
    match field {
        PostField::Title => Expr::col((post::Entity, post::Column::Title)).into(),
        PostField::Content => Expr::col((post::Entity, post::Column::Content)).into(),
        PostField::CategoryName => Expr::col((category::Entity, category::Column::Name)).into(),
    }
}

/// Escape LIKE metacharacters so the keyword matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
