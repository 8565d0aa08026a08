use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{errors::AppError, handlers::json_error::JsonError};

/// Upper bound for a whole multipart body; the per-image limit is checked on store.
const MULTIPART_TOTAL_LIMIT: usize = 20 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        JsonError::from(err).into()
    }));
    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(MULTIPART_TOTAL_LIMIT)
            .error_handler(|err, _req| AppError::from(err).into()),
    );
}
