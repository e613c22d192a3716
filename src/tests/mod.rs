mod test_homing;
