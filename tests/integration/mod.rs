mod helpers;
mod test_publish;
mod test_release;
