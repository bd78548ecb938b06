mod media;
mod request;
mod response;
