mod api_client_tests;
