mod backward;
