use sea_orm::{
    DbErr, EntityTrait, Order, QueryOrder, Select, SqlErr,
    sea_query::{Func, SimpleExpr},
};

pub trait OrderByRandom {
    fn order_by_random(self) -> Self;
}

impl<E> OrderByRandom for Select<E>
where
    E: EntityTrait,
{
    fn order_by_random(mut self) -> Self {
        QueryOrder::query(&mut self)
            .order_by_expr(SimpleExpr::FunctionCall(Func::random()), Order::Desc);
        self
    }
}

/// Connection-level failures worth retrying. Constraint violations and
/// malformed queries are permanent.
pub fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
