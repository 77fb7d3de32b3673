mod client_test;
mod helpers;
mod pdf_test;
mod project_test;
mod router_test;
mod user_test;
