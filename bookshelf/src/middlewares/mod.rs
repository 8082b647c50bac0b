pub mod login_required;
