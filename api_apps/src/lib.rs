use actix_web::web::{self};

pub mod routes {
    pub mod app;
}

mod services {
    pub(crate) mod app;
}

mod dtos {
    pub(crate) mod app;
}

pub fn mount_apps() -> actix_web::Scope {
    web::scope("/apps")
        .service(routes::app::get_apps)
        .service(routes::app::post_create)
        .service(routes::app::put_update)
        .service(routes::app::delete_app)
        .service(routes::app::post_regenerate)
}
