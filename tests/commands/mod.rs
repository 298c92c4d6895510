mod test_listen;
