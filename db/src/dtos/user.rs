pub struct UserCreateRequest {
    pub email: String,
    pub username: Option<String>,
}
