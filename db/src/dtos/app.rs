use uuid::Uuid;

pub struct AppCreateRequest {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub api_key: String,
}

pub struct AppUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}
