mod test_peer_disconnect;
