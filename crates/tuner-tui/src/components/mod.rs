pub mod picker;
pub mod radio_form;
pub mod radio_list;
pub mod receiver_list;
pub mod server_list;
