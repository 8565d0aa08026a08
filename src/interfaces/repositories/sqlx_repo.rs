use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSkillRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCategoryRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxTestimonialRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxDashboardRepo {
    pub pool: PgPool,
}
