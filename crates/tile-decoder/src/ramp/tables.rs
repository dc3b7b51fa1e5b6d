//! Hex-encoded stop tables for the two supported color ramps.
//!
//! Each stop is two hex digits per color channel and four hex digits of
//! value, in thousandths of a microsievert per hour.

/// A ramp as stored: parallel hex strings, one entry per stop.
pub(super) struct EncodedRamp {
    pub red: &'static str,
    pub green: &'static str,
    pub blue: &'static str,
    pub value: &'static str,
}

/// 329-stop ramp used by the interpolated grid layers.
pub(super) const DENSE: EncodedRamp = EncodedRamp {
    red: concat!(
        "01190D38381F568AADC8DAEDFBFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
    ),
    green: concat!(
        "010F1069AAEAE9C9A9886C4B220000000000000000000000000000000000091B27343B464E54585F61696C75797E8285",
        "888E9194999B9EA2A4A7A9AFB4B5B8BDBFC0C3C6C9CBCCCED0D3D5D7D8DADDE0E1E3E6E8EBECEEF0F3F6F7F9FAFBFCFD",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
    ),
    blue: concat!(
        "017CFFFFFFFFFFFFFFFFFFFFFFEFD2BAA6978174665B4D433931281F1408000000000000000000000000000000000000",
        "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
        "0002040608090B0E101314151617191B1D1E202122232425262728292A2B2C2D2E2F303132333536383A3C3E3F404143",
        "44454648494A4B4C4D4E4F505152535455565758595A5B5C5D5E5F606162636465666768696A6B6C6D6E6F7071727374",
        "75767778797A7B7C7D7E7F808182838485868788898A8B8C8D8E8F909192939495969798999A9B9C9D9E9FA0A1A2A3A4",
        "A5A6A7A8A9AAABACADAEAFB0B1B2B3B4B5B6B7B8B9BABBBCBDBEBFC0C1C2C3C4C5C6C7C8C9CACBCCCDCECFD0D1D2D3D4",
        "D5D6D7D8D9DADBDCDDDEDFE0E1E2E3E4E5E6E7E8E9EAEBECEDEEEFF0F1F2F3F4F5F6F7F8F9FAFBFCFD",
    ),
    value: concat!(
        "001E003E005E007E009E00BE00DE00FE011E013E015E017E019E01BE01DE01FE021E023E025E027E029E02BE02DE02FE",
        "031E033E035E037E039E03BE03DE03FE041E043E045E047E049E04BE04DE04FE051E053E055E057E059E05BE05DE05FE",
        "061E063E065E067E069E06BE06DE06FE071E073E075E077E079E07BE07DD07FD081E083E085E087E089E08BE08DE08FE",
        "091E093E095E097E099E09BE09DE09FE0A3E0A5E0A7E0A9E0ABE0ADE0AFE0B1E0B3E0B5E0B7E0B9E0BBE0BDE0BFE0C1E",
        "0C3E0C5E0C7E0C9E0CBE0CFE0D3E0D5E0D7E0D9E0DBE0DDE0E1E0E3E0E5E0E7E0E9E0EBE0EDE0EFE0F1E0F3E0F5E0F7E",
        "0F9E0FBE0FDE0FFE101E103E105E107E109E10BE10DE10FE113E115E117E119E11BE11DE11FE121E127E12BE12FE131E",
        "133E135E137E139E13BE13DE141E145E147E14BE14FE151E153E157E159E15BE15FE161E165E167E16BE16DE171E177E",
        "17BE17FE181E185E187E189E18BE18FE191E193E19BE1A1E1A9E1ABE1ADE1B1E1B3E1B5E1B7E1B9E1BBE1BFE1C1E1C9E",
        "1D1E1DBE1DDE1DFE1E3E1E5E1E7E1EBE1EDE1F1E1F3E1F7D1FBD201E207E20FE215E21BE221E229E22FE235E23BE23FE",
        "245E24BE24FE255E25BE267E275E283E287E28DE291E297E29BE2A1E2A5E2ABE2AFE2C7E2E1E2E7E2EDE2F3E2F9E2FFE",
        "305E30BE313E319E327E337E347E357E361E36BE373E37DE387E393E39DE3A7E3B3E3BDE3C9E3D5E3DFE3EBE3FDE40FE",
        "421E433E445E453E461E471E47FE48DE49DE4ADE4C9E4E5E503E523E531E53FE54FE55DE56DE57BE58BE59BE5ABE5D1E",
        "5F9E621E64BE663E67DE697E6B3E6CDE6E9E707E73BE771E7A9E7E5E80FD839D865D891D8BFD8EFD921D953D987D9BFD",
        "9F7DA31DA8BDAEDDB51DBB9DBE3DC0BDC35DC5FDC8BDCB7DCE3DD13DD41DD71DDA1D",
    ),
};

/// 64-stop ramp used by the point and density layers.
pub(super) const COARSE: EncodedRamp = EncodedRamp {
    red: concat!(
        "070F1316191A1A19181306192730373A3B3A362C1F144B6C869CB0C1D1DEEEFAFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
    ),
    green: concat!(
        "060B0D0E0F0F0F0E0D0A0520394E64788EA3BCD3EAFCEDDCCBB9A6947E684C24000000000000000000000327465C7287",
        "9AAFC5D8EDFEFFFFFFFFFFFFFFFFFFFF",
    ),
    blue: concat!(
        "0A1A2A3D5168839CBBD9F8FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF4D9BCA48B7560493623080000000000",
        "0000000000051C324B627C93AAC2DBF1",
    ),
    value: concat!(
        "001E00220027002C00310036003C00420049004F0056005E0066006E00770080008A009500A000AC00B800C600D400E4",
        "00F401060118012C014201590173018E01AB01CB01EE0214023E026B029E02D50312035603A203F7045704C3053F05CC",
        "066F072D080C09130A4F0BCF0DA70FF712EB16CB1C0523562E0C3EB15AA48ED1",
    ),
};
