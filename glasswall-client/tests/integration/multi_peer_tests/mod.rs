mod test_real_transports;
mod test_three_participants;
mod test_two_participants;
