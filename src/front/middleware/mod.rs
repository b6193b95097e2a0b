pub mod gateway_user;
