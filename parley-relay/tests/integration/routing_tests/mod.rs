mod test_pre_offer_to_unknown_callee;
