mod decode_good;
