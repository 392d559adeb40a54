mod details;
mod form;
mod panels;
