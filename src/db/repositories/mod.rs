mod categories;
mod sessions;
