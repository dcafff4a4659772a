mod billing;
mod images;
mod memes;
mod profile;
mod templates;
