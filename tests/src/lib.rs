#[cfg(test)]
mod api;
#[cfg(test)]
mod discovery;
