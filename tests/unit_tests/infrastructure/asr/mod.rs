mod daglo_client_test;
