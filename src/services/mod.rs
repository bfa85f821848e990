pub(crate) mod events;
pub(crate) mod listings;
pub(crate) mod movies;
pub(crate) mod posters;
pub(crate) mod text_utils;
pub(crate) mod update;
