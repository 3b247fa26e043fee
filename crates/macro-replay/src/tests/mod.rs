mod terminal_status;
