//! Opcode numbers.
//!
//! Interface-level (`IF_`) variants of component commands are the `CC_` opcode
//! plus 1000 and take the target component as an extra last argument.

#![allow(missing_docs)]

pub const PUSH_CONSTANT_INT: u16 = 0;
pub const GET_VAR: u16 = 1;
pub const SET_VAR: u16 = 2;
pub const PUSH_CONSTANT_STRING: u16 = 3;
pub const BRANCH: u16 = 6;
pub const BRANCH_NOT: u16 = 7;
pub const BRANCH_EQUALS: u16 = 8;
pub const BRANCH_LESS_THAN: u16 = 9;
pub const BRANCH_GREATER_THAN: u16 = 10;
pub const RETURN: u16 = 21;
pub const GET_VARBIT: u16 = 25;
pub const SET_VARBIT: u16 = 27;
pub const BRANCH_LESS_THAN_OR_EQUALS: u16 = 31;
pub const BRANCH_GREATER_THAN_OR_EQUALS: u16 = 32;
pub const PUSH_INT_LOCAL: u16 = 33;
pub const POP_INT_LOCAL: u16 = 34;
pub const PUSH_STRING_LOCAL: u16 = 35;
pub const POP_STRING_LOCAL: u16 = 36;
pub const JOIN_STRING: u16 = 37;
pub const POP_INT_DISCARD: u16 = 38;
pub const POP_STRING_DISCARD: u16 = 39;
/// `gosub_with_params` in the current revision, `invoke` in the legacy one.
pub const GOSUB_WITH_PARAMS: u16 = 40;
pub const GET_VARC_INT: u16 = 42;
pub const SET_VARC_INT: u16 = 43;
pub const DEFINE_ARRAY: u16 = 44;
pub const PUSH_ARRAY_INT: u16 = 45;
pub const POP_ARRAY_INT: u16 = 46;
pub const GET_VARC_STRING: u16 = 49;
pub const SET_VARC_STRING: u16 = 50;
pub const SWITCH: u16 = 60;

pub const CC_CREATE: u16 = 100;
pub const CC_DELETE: u16 = 101;
pub const CC_DELETEALL: u16 = 102;
pub const CC_FIND: u16 = 200;
pub const IF_FIND: u16 = 201;

pub const CC_SETPOSITION: u16 = 1000;
pub const CC_SETSIZE: u16 = 1001;
pub const CC_SETHIDE: u16 = 1003;
pub const CC_SETSCROLLPOS: u16 = 1100;
pub const CC_SETCOLOUR: u16 = 1101;
pub const CC_SETFILL: u16 = 1102;
pub const CC_SETTRANS: u16 = 1103;
pub const CC_SETGRAPHIC: u16 = 1105;
pub const CC_SET2DANGLE: u16 = 1106;
pub const CC_SETMODEL: u16 = 1108;
pub const CC_SETMODELANIM: u16 = 1110;
pub const CC_SETTEXT: u16 = 1112;
pub const CC_SETTEXTFONT: u16 = 1113;
pub const CC_SETTEXTALIGN: u16 = 1114;
pub const CC_SETTEXTSHADOW: u16 = 1115;
pub const CC_SETOBJECT: u16 = 1200;
pub const CC_SETNPCHEAD: u16 = 1201;
pub const CC_SETOP: u16 = 1300;
pub const CC_SETDRAGGABLE: u16 = 1301;
pub const CC_SETOPBASE: u16 = 1305;
pub const CC_CLEAROPS: u16 = 1307;

pub const CC_SETONCLICK: u16 = 1400;
pub const CC_SETONVARTRANSMIT: u16 = 1407;
pub const CC_SETONTIMER: u16 = 1408;
pub const CC_SETONOP: u16 = 1409;
pub const CC_SETONINVTRANSMIT: u16 = 1414;
pub const CC_SETONSTATTRANSMIT: u16 = 1415;
pub const CC_SETONKEY: u16 = 1419;
pub const CC_SETONRESIZE: u16 = 1427;
pub const CC_SETONVARCTRANSMIT: u16 = 1428;
pub const CC_SETONVARCSTRTRANSMIT: u16 = 1429;

pub const CC_GETX: u16 = 1500;
pub const CC_GETY: u16 = 1501;
pub const CC_GETWIDTH: u16 = 1502;
pub const CC_GETHEIGHT: u16 = 1503;
pub const CC_GETHIDE: u16 = 1504;
pub const CC_GETTEXT: u16 = 1602;
pub const CC_GETTRANS: u16 = 1609;
pub const CC_GETINVOBJECT: u16 = 1700;
pub const CC_GETINVCOUNT: u16 = 1701;
pub const CC_GETID: u16 = 1702;
pub const CC_GETOP: u16 = 1801;

/// Offset from a `CC_` opcode to its `IF_` counterpart.
pub const IF_OFFSET: u16 = 1000;

pub const IF_SETPOSITION: u16 = CC_SETPOSITION + IF_OFFSET;
pub const IF_SETSIZE: u16 = CC_SETSIZE + IF_OFFSET;
pub const IF_SETHIDE: u16 = CC_SETHIDE + IF_OFFSET;
pub const IF_SETCOLOUR: u16 = CC_SETCOLOUR + IF_OFFSET;
pub const IF_SETGRAPHIC: u16 = CC_SETGRAPHIC + IF_OFFSET;
pub const IF_SETTEXT: u16 = CC_SETTEXT + IF_OFFSET;
pub const IF_SETOBJECT: u16 = CC_SETOBJECT + IF_OFFSET;
pub const IF_SETOP: u16 = CC_SETOP + IF_OFFSET;
pub const IF_SETONCLICK: u16 = CC_SETONCLICK + IF_OFFSET;
pub const IF_GETX: u16 = CC_GETX + IF_OFFSET;
pub const IF_GETY: u16 = CC_GETY + IF_OFFSET;
pub const IF_GETWIDTH: u16 = CC_GETWIDTH + IF_OFFSET;
pub const IF_GETHEIGHT: u16 = CC_GETHEIGHT + IF_OFFSET;
pub const IF_GETHIDE: u16 = CC_GETHIDE + IF_OFFSET;
pub const IF_GETTEXT: u16 = CC_GETTEXT + IF_OFFSET;
pub const IF_HASSUB: u16 = 2702;
pub const IF_GETTOP: u16 = 2706;

pub const MES: u16 = 3100;
pub const ANIM: u16 = 3101;
pub const IF_CLOSE: u16 = 3103;
pub const OPENURL: u16 = 3113;
pub const SOUND_SYNTH: u16 = 3200;
pub const SOUND_SONG: u16 = 3201;
pub const CLIENTCLOCK: u16 = 3300;
pub const INV_GETOBJ: u16 = 3301;
pub const INV_GETNUM: u16 = 3302;
pub const INV_TOTAL: u16 = 3303;
pub const INV_SIZE: u16 = 3304;
pub const STAT: u16 = 3305;
pub const STAT_BASE: u16 = 3306;
pub const STAT_XP: u16 = 3307;
pub const COORD: u16 = 3308;
pub const COORDX: u16 = 3309;
pub const COORDY: u16 = 3310;
pub const COORDZ: u16 = 3311;
pub const MAP_MEMBERS: u16 = 3312;
pub const MOVECOORD: u16 = 3325;
pub const ENUM_STRING: u16 = 3400;
pub const ENUM: u16 = 3408;
pub const ENUM_HASOUTPUT: u16 = 3409;
pub const ENUM_GETOUTPUTCOUNT: u16 = 3411;
pub const FRIEND_COUNT: u16 = 3600;
pub const FRIEND_GETNAME: u16 = 3601;

pub const ADD: u16 = 4000;
pub const SUB: u16 = 4001;
pub const MULTIPLY: u16 = 4002;
pub const DIV: u16 = 4003;
pub const RANDOM: u16 = 4004;
pub const RANDOMINC: u16 = 4005;
pub const INTERPOLATE: u16 = 4006;
pub const ADDPERCENT: u16 = 4007;
pub const SETBIT: u16 = 4008;
pub const CLEARBIT: u16 = 4009;
pub const TESTBIT: u16 = 4010;
pub const MOD: u16 = 4011;
pub const POW: u16 = 4012;
pub const AND: u16 = 4014;
pub const OR: u16 = 4015;
pub const MIN: u16 = 4016;
pub const MAX: u16 = 4017;

pub const APPEND_NUM: u16 = 4100;
pub const APPEND: u16 = 4101;
pub const APPEND_SIGNNUM: u16 = 4102;
pub const LOWERCASE: u16 = 4103;
pub const TOSTRING: u16 = 4106;
pub const COMPARE: u16 = 4107;
pub const PARAHEIGHT: u16 = 4108;
pub const PARAWIDTH: u16 = 4109;
pub const TEXT_SWITCH: u16 = 4110;
pub const APPEND_CHAR: u16 = 4112;
pub const STRING_LENGTH: u16 = 4117;
pub const SUBSTRING: u16 = 4118;
pub const STRING_INDEXOF_STRING: u16 = 4122;

pub const OC_NAME: u16 = 4200;
pub const OC_OP: u16 = 4201;
pub const OC_IOP: u16 = 4202;
pub const OC_COST: u16 = 4203;
pub const OC_STACKABLE: u16 = 4204;

pub const NC_PARAM: u16 = 6513;
pub const LC_PARAM: u16 = 6514;
pub const OC_PARAM: u16 = 6515;
pub const STRUCT_PARAM: u16 = 6516;
pub const MEC_TEXT: u16 = 6693;
pub const MEC_PARAM: u16 = 6698;

pub const DB_GETFIELD: u16 = 7502;

/// Short-circuit `&&` of two branch conditions. Never appears in bytecode.
pub const SS_AND: u16 = u16::MAX - 1;
/// Short-circuit `||` of two branch conditions. Never appears in bytecode.
pub const SS_OR: u16 = u16::MAX;
