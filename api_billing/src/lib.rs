use actix_web::web::{self};

pub mod routes {
    pub mod billing;
    pub mod webhook;
}

pub mod services {
    pub mod catalog;
    pub mod checkout;
    pub mod customer;
    pub mod subscription;
    pub mod webhook;
}

pub mod dtos {
    pub mod billing;
}

pub fn mount_billing() -> actix_web::Scope {
    web::scope("/billing")
        .service(routes::billing::get_plans)
        .service(routes::billing::get_subscription)
        .service(routes::billing::post_checkout)
        .service(routes::billing::post_portal)
        .service(routes::billing::post_auto_renew)
        .service(routes::billing::post_sync)
}

pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/billing").service(routes::webhook::post_webhook)
}
